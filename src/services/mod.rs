//! Business services: pricing, draft assembly, checkout orchestration,
//! customer resolution, catalog proxying, and the OTP store.

pub mod catalog;
pub mod checkout;
pub mod customers;
pub mod drafts;
pub mod otp;
pub mod pricing;

pub use catalog::CatalogService;
pub use checkout::CheckoutService;
pub use customers::CustomerResolver;
pub use otp::OtpStore;
