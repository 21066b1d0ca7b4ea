/// Capability boundary around the wallet/identity provider. The core only
/// needs to know whether an identity is connected and which address to use as
/// the fetch/submit key; signing stays outside.
pub trait WalletSession {
    fn current_address(&self) -> Option<String>;

    fn is_connected(&self) -> bool {
        self.current_address().is_some()
    }
}

/// Wallet session with a fixed identity, for wiring an address supplied at
/// startup and for tests. "Disconnected" is a valid, quiet state.
#[derive(Clone, Debug, Default)]
pub struct StaticWallet {
    address: Option<String>,
}

impl StaticWallet {
    pub fn connected(address: impl Into<String>) -> Self {
        Self {
            address: Some(address.into()),
        }
    }

    pub fn disconnected() -> Self {
        Self { address: None }
    }
}

impl WalletSession for StaticWallet {
    fn current_address(&self) -> Option<String> {
        self.address.clone()
    }
}
