//! Round trip against a running gateway
//!
//! This example demonstrates:
//! - Uploading an object with a content type
//! - Conditional reads with the returned ETag
//! - Range reads
//! - Deleting the object
//!
//! Start a gateway first (`cargo run -p objgate-gateway -- --auth-token secret`),
//! then run with: AUTH_TOKEN=secret cargo run --example round_trip

use objgate_client::{ClientError, Config, GatewayClient, GetRequest, PutRequest};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let endpoint =
        std::env::var("OBJGATE_ENDPOINT").unwrap_or_else(|_| "http://localhost:8787".to_string());
    let mut config = Config::new(endpoint);
    if let Ok(token) = std::env::var("AUTH_TOKEN") {
        config = config.with_token(token);
    }
    let client = GatewayClient::new(config)?;

    println!("📤 Uploading 'demo/hello.txt'...");
    client
        .put_object(
            "demo/hello.txt",
            "Hello from objgate!",
            PutRequest::default().with_content_type("text/plain"),
        )
        .await?;

    let object = client.get_object("demo/hello.txt", GetRequest::default()).await?;
    let etag = object.etag.clone().unwrap_or_default();
    println!("   ✅ {} bytes, ETag {}", object.data.len(), etag);

    println!("\n🔁 Conditional read with If-None-Match...");
    match client
        .get_object("demo/hello.txt", GetRequest::default().with_if_none_match(&etag))
        .await
    {
        Err(ClientError::PreconditionFailed(_)) => println!("   ✅ Unchanged, 412 as expected"),
        Ok(_) => println!("   ⚠️  Object changed since the first read"),
        Err(e) => return Err(e.into()),
    }

    println!("\n✂️  Reading bytes 0-4...");
    let part = client
        .get_object("demo/hello.txt", GetRequest::default().with_range(0, 4))
        .await?;
    println!(
        "   ✅ {:?} ({})",
        String::from_utf8_lossy(&part.data),
        part.content_range.unwrap_or_default()
    );

    println!("\n🗑️  Deleting...");
    client.delete_object("demo/hello.txt").await?;
    println!("   ✅ Deleted");

    Ok(())
}
