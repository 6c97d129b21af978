#[tokio::main]
async fn main() -> anyhow::Result<()> {
    audio_correction::run().await
}
