use anyhow::Result;
use std::sync::Arc;
use world_property::config::WorldPropertyConfig;
use world_property::fx::{FxService, StaticRateProvider};

pub struct ConvertCommand {
    pub amount: f64,
    pub from: String,
    pub to: String,
}

impl ConvertCommand {
    pub async fn execute(&self, config: &WorldPropertyConfig) -> Result<()> {
        let service = FxService::new(Arc::new(StaticRateProvider::default()), config.fx.cache_ttl());

        match service.convert(self.amount, &self.from, &self.to).await {
            Ok(converted) => {
                println!(
                    "💱 {:.2} {} = {:.2} {}",
                    self.amount,
                    self.from.trim().to_uppercase(),
                    converted,
                    self.to.trim().to_uppercase()
                );
                Ok(())
            }
            Err(e) => {
                let supported = service.rates().await?.supported_currencies().join(", ");
                println!("❌ {}", e);
                println!("   💡 Supported currencies: {}", supported);
                Err(e.into())
            }
        }
    }
}
