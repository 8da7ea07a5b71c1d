#[actix_web::main]
async fn main() -> std::io::Result<()> {
    ipb_chat_server::run().await
}
