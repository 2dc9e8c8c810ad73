use posting_fit_api::run;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("posting-fit: {err}");
        std::process::exit(1);
    }
}
