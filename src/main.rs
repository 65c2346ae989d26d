#[tokio::main]
async fn main() {
    if let Err(err) = mwap_backend::start_web_server().await {
        eprintln!("Unable to start the server: {err:?}");
        std::process::exit(1);
    }
}
