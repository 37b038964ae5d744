use std::fmt;

#[derive(Debug)]
pub enum ProviderError {
    CredentialsNotFound(String),
    ConfigNotFound(String),
    Api {
        code: String,
        message: String,
        request_id: String,
    },
    Http(reqwest::Error),
    InvalidParameter(String),
    InvalidResponse(String),
    GroupNotFound {
        group: String,
        load_balancer_id: String,
    },
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::Http(err)
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::CredentialsNotFound(msg) => {
                writeln!(f, "Alibaba Cloud Credential Error")?;
                writeln!(f, "──────────────────────────────")?;
                write!(f, "🔑 {msg}\n\n")?;
                writeln!(f, "🔧 QUICK FIXES:")?;
                writeln!(
                    f,
                    "   → export ALIBABA_CLOUD_ACCESS_KEY_ID=your_key_id"
                )?;
                writeln!(
                    f,
                    "   → export ALIBABA_CLOUD_ACCESS_KEY_SECRET=your_key_secret"
                )?;
                write!(
                    f,
                    "   → Or set provider.access_key_id / provider.access_key_secret in aliawan.toml"
                )
            }
            ProviderError::ConfigNotFound(msg) => {
                writeln!(f, "Aliawan Configuration Error")?;
                writeln!(f, "───────────────────────────")?;
                write!(f, "📂 {msg}\n\n")?;
                writeln!(f, "🔧 QUICK FIXES:")?;
                writeln!(f, "   → Create aliawan.toml next to the binary")?;
                write!(f, "   → Or set ALIAWAN_-prefixed environment variables")
            }
            ProviderError::Api {
                code,
                message,
                request_id,
            } => {
                writeln!(f, "Alibaba Cloud API Error")?;
                writeln!(f, "───────────────────────")?;
                write!(f, "🌐 {code}: {message}\n\n")?;
                writeln!(f, "🔧 TROUBLESHOOTING:")?;
                writeln!(f, "   → Check RAM permissions for this API action")?;
                writeln!(f, "   → Verify the region and resource ids exist")?;
                write!(f, "   → Quote RequestId {request_id} when contacting support")
            }
            ProviderError::Http(err) => {
                writeln!(f, "Alibaba Cloud Network Error")?;
                writeln!(f, "───────────────────────────")?;
                write!(f, "🌐 {err}\n\n")?;
                writeln!(f, "🔧 TROUBLESHOOTING:")?;
                writeln!(f, "   → Check connectivity to the configured endpoint")?;
                write!(f, "   → Verify proxy/firewall settings for outbound HTTPS")
            }
            ProviderError::InvalidParameter(msg) => {
                write!(f, "Invalid parameter: {msg}")
            }
            ProviderError::InvalidResponse(msg) => {
                writeln!(f, "Unexpected provider response")?;
                write!(f, "📄 {msg}")
            }
            ProviderError::GroupNotFound {
                group,
                load_balancer_id,
            } => {
                writeln!(
                    f,
                    "VServer group '{group}' not found on load balancer {load_balancer_id}"
                )?;
                writeln!(f, "🔧 QUICK FIXES:")?;
                writeln!(f, "   → Check the group name spelling with --vgroupname")?;
                write!(f, "   → Verify slb.load_balancer_id points at the right SLB")
            }
        }
    }
}

impl std::error::Error for ProviderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProviderError::Http(err) => Some(err),
            _ => None,
        }
    }
}
