pub mod stripe;
pub mod webhook;

pub use stripe::{CheckoutSession, PortalSession, StripeClient, Subscription};
pub use webhook::{handle_event, verify_signature, WebhookEvent};
