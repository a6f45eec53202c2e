#[actix_web::main]
async fn main() -> std::io::Result<()> {
    meldeschein_server::run().await
}
