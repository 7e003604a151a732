#[tokio::main]
async fn main() {
    tutoria_backend::run().await;
}
