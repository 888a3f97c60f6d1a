//! Wallet session state.
//!
//! Disconnected -> Connected(provider) -> Signed. Trading commands need a
//! signed session; when one is missing the terminal records which step of the
//! connect flow the user should be shown next.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WalletProvider {
    WalletConnect,
    Metamask,
    #[serde(rename = "OKX Wallet")]
    OkxWallet,
    #[serde(rename = "Binance Wallet")]
    BinanceWallet,
}

impl WalletProvider {
    pub fn display_name(&self) -> &'static str {
        match self {
            WalletProvider::WalletConnect => "WalletConnect",
            WalletProvider::Metamask => "Metamask",
            WalletProvider::OkxWallet => "OKX Wallet",
            WalletProvider::BinanceWallet => "Binance Wallet",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionState {
    #[default]
    Disconnected,
    Connected(WalletProvider),
    Signed(WalletProvider),
}

/// Next step of the connect flow to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectPrompt {
    SelectWallet,
    Sign,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    state: SessionState,
    pending_prompt: Option<ConnectPrompt>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_signed(&self) -> bool {
        matches!(self.state, SessionState::Signed(_))
    }

    pub fn provider(&self) -> Option<WalletProvider> {
        match self.state {
            SessionState::Disconnected => None,
            SessionState::Connected(p) | SessionState::Signed(p) => Some(p),
        }
    }

    // picking a wallet always restarts at the sign step
    pub fn connect(&mut self, provider: WalletProvider) {
        self.state = SessionState::Connected(provider);
        self.pending_prompt = Some(ConnectPrompt::Sign);
    }

    /// Returns false when there is no connected wallet to sign with.
    pub fn sign(&mut self) -> bool {
        match self.state {
            SessionState::Connected(p) | SessionState::Signed(p) => {
                self.state = SessionState::Signed(p);
                self.pending_prompt = None;
                true
            }
            SessionState::Disconnected => {
                self.pending_prompt = Some(ConnectPrompt::SelectWallet);
                false
            }
        }
    }

    pub fn disconnect(&mut self) {
        self.state = SessionState::Disconnected;
        self.pending_prompt = None;
    }

    // called when a command was refused for lack of a signed session
    pub fn raise_prompt(&mut self) -> ConnectPrompt {
        let prompt = match self.state {
            SessionState::Disconnected => ConnectPrompt::SelectWallet,
            SessionState::Connected(_) | SessionState::Signed(_) => ConnectPrompt::Sign,
        };
        self.pending_prompt = Some(prompt);
        prompt
    }

    pub fn pending_prompt(&self) -> Option<ConnectPrompt> {
        self.pending_prompt
    }

    pub fn take_prompt(&mut self) -> Option<ConnectPrompt> {
        self.pending_prompt.take()
    }
}
