use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    pos_client::frameworks::cli::run().await
}
