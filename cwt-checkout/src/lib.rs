pub mod allocator;
pub mod coordinator;
pub mod tracker;

pub use allocator::{AllocatedNumber, AllocatorError, SequenceAllocator};
pub use coordinator::{
    CheckoutCoordinator, CheckoutError, FinalizeOutcome, FinalizeRequest, RetryPolicy,
    SingleOutcome,
};
pub use tracker::PaymentStateTracker;
