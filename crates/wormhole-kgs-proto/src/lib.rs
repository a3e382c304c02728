//! Wire types and client stub for the Key Generation Service (KGS).

pub mod kgs {
    pub mod v1 {
        tonic::include_proto!("kgs.v1");
    }
}

pub mod v1 {
    pub use crate::kgs::v1::*;
}
