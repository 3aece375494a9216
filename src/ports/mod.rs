//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Persistence Ports
//!
//! - `SubscriptionRepository` - Subscription aggregate persistence with
//!   optimistic locking
//! - `OrganizationRepository` - Read access to tenant organizations
//!
//! ## Payment Ports
//!
//! - `PaymentProvider` - Square customer, invoice, and webhook operations
//!
//! ## Event Ports
//!
//! - `EventPublisher` - Port for publishing domain events
//! - `EventSubscriber` - Port for subscribing to domain events
//! - `EventHandler` - Handler that processes incoming events

mod event_publisher;
mod event_subscriber;
mod organization_repository;
mod payment_provider;
mod subscription_repository;

pub use event_publisher::EventPublisher;
pub use event_subscriber::{EventBus, EventHandler, EventSubscriber};
pub use organization_repository::{OrganizationRecord, OrganizationRepository};
pub use payment_provider::{
    CreateCustomerRequest, CreateInvoiceRequest, Customer, Invoice, InvoiceStatus, PaymentError,
    PaymentErrorCode, PaymentProvider, WebhookEvent, WebhookEventData, WebhookEventType,
};
pub use subscription_repository::SubscriptionRepository;
