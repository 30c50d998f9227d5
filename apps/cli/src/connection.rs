//! 配置加载与 servicer 连接
//!
//! 命令行参数优先于配置文件。

use anyhow::{Context, Result};
use clap::Args;
use tcode_client::TCodeServicerClient;
use tcode_servicer::{HttpServicer, validate_servicer_url};
use tcode_tools::ClientConfig;

/// 加载并检查配置（默认路径，或 `$TCODE_CONFIG`）
pub fn load_config() -> Result<ClientConfig> {
    let path = ClientConfig::default_path()?;
    let config = ClientConfig::load(&path)
        .with_context(|| format!("加载配置失败: {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("配置无效: {}", path.display()))?;
    Ok(config)
}

/// servicer 连接参数
#[derive(Args, Debug, Clone, Default)]
pub struct ServicerArgs {
    /// servicer 地址（覆盖配置）
    #[arg(long)]
    pub servicer_url: Option<String>,
}

impl ServicerArgs {
    /// 最终使用的地址
    pub fn url(&self, config: &ClientConfig) -> Result<String> {
        let url = self
            .servicer_url
            .as_deref()
            .unwrap_or(config.servicer_url.as_str());
        Ok(validate_servicer_url(url)?)
    }

    pub fn connect(&self, config: &ClientConfig) -> Result<TCodeServicerClient<HttpServicer>> {
        let url = self.url(config)?;
        let servicer = HttpServicer::with_timeout(&url, config.timeout())
            .with_context(|| format!("无法创建 servicer 客户端: {}", url))?;
        tracing::debug!(url = %servicer.base_url(), "Using servicer");
        Ok(TCodeServicerClient::new(servicer).with_poll_interval(config.poll_interval()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_overrides_config() {
        let config = ClientConfig::default();
        let args = ServicerArgs {
            servicer_url: Some("https://lab:9000".into()),
        };
        assert_eq!(args.url(&config).unwrap(), "https://lab:9000");

        let args = ServicerArgs::default();
        assert_eq!(args.url(&config).unwrap(), "http://localhost:8002");
    }

    #[test]
    fn test_invalid_url_rejected() {
        let args = ServicerArgs {
            servicer_url: Some("lab:9000".into()),
        };
        assert!(args.url(&ClientConfig::default()).is_err());
    }
}
