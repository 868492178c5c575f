//! Read single set totals from a controller

use checkweigher::{load_layout, Checkweigher, DeviceConfig};

#[tokio::main]
async fn main() -> checkweigher::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let ip = std::env::var("DEVICE_IP").unwrap_or_else(|_| "192.168.1.50".to_string());

    let layout = load_layout("./configs/checkweigher.yaml")?;
    let mut device = Checkweigher::new(DeviceConfig::new(ip, 1001), layout);

    let totals = device.single_set_totals().await?;

    for (name, value) in totals.iter() {
        println!("{:>20}: {}", name, value.trim());
    }

    device.disconnect().await?;

    Ok(())
}
