#[actix_web::main]
async fn main() {
    if let Err(err) = casegen_lib::app::run().await {
        eprintln!("casegen failed to start: {}", err);
        std::process::exit(1);
    }
}
