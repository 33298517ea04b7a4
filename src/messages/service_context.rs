use serde::{Deserialize, Serialize};

/// One entry of the service context list carried by Request and Reply
/// headers. Context data is an opaque encapsulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceContext {
  pub context_id: u32,
  pub context_data: Vec<u8>,
}

pub type ServiceContextList = Vec<ServiceContext>;

impl ServiceContext {
  pub const TRANSACTION_SERVICE: u32 = 0;
  pub const CODE_SETS: u32 = 1;
  pub const BI_DIR_IIOP: u32 = 5;
  pub const SENDING_CONTEXT_RUN_TIME: u32 = 6;

  pub fn new(context_id: u32, context_data: Vec<u8>) -> ServiceContext {
    ServiceContext {
      context_id,
      context_data,
    }
  }
}
