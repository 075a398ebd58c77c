pub mod line_item;
pub mod payment;
pub mod repository;
pub mod voucher;

pub use line_item::{BookingStamp, ItemKind, ItemRef, LineItem};
pub use payment::{AttemptStatus, CustomerContact, GatewayMetadata, PaymentAttempt, PaymentStatus};
pub use repository::{
    AttemptLog, ConfirmationRequest, LineItemStore, NotificationSink, SequenceStore, StoreError,
};
