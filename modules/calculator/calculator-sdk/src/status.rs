//! Mapping between [`Fault`] and gRPC [`Status`].
//!
//! The status code alone cannot tell a divide-by-zero from a malformed request
//! (both are `INVALID_ARGUMENT`), so the fault kind also travels in the
//! `x-fault-kind` metadata entry. gRPC-Web carries it as a trailer or header.

use tonic::metadata::MetadataValue;
use tonic::{Code, Status};

use crate::api::{Fault, FaultKind};

/// Metadata key carrying [`FaultKind::as_str`].
pub const FAULT_KIND_METADATA_KEY: &str = "x-fault-kind";

/// gRPC code used on the wire for a fault kind.
#[must_use]
pub const fn code_for_kind(kind: FaultKind) -> Code {
    match kind {
        FaultKind::InvalidOperation => Code::Unimplemented,
        FaultKind::DivideByZero | FaultKind::MalformedRequest => Code::InvalidArgument,
        FaultKind::TransportUnavailable => Code::Unavailable,
    }
}

/// Fault kind implied by a bare status code, when no `x-fault-kind` entry is present.
///
/// Faults raised by the calculator service are always tagged. An untagged
/// `INTERNAL` comes from the local codec failing on a reply it could not
/// decode, so it is classed with the transport failures.
#[must_use]
pub const fn kind_for_code(code: Code) -> FaultKind {
    match code {
        Code::Unimplemented => FaultKind::InvalidOperation,
        Code::InvalidArgument | Code::OutOfRange => FaultKind::MalformedRequest,
        _ => FaultKind::TransportUnavailable,
    }
}

impl From<Fault> for Status {
    fn from(fault: Fault) -> Self {
        let kind = fault.kind();
        let mut status = Status::new(code_for_kind(kind), fault.message());
        status.metadata_mut().insert(
            FAULT_KIND_METADATA_KEY,
            MetadataValue::from_static(kind.as_str()),
        );
        status
    }
}

impl Fault {
    /// Recover the fault carried by a gRPC status.
    #[must_use]
    pub fn from_status(status: &Status) -> Self {
        let tagged = status
            .metadata()
            .get(FAULT_KIND_METADATA_KEY)
            .and_then(|v| v.to_str().ok())
            .and_then(FaultKind::from_tag);
        let kind = tagged.unwrap_or_else(|| kind_for_code(status.code()));

        let message = if status.message().is_empty() {
            format!("call failed with gRPC status {:?}", status.code())
        } else {
            status.message().to_owned()
        };
        Fault::new(kind, message)
    }
}

impl From<Status> for Fault {
    fn from(status: Status) -> Self {
        Fault::from_status(&status)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_fault_survives_status_round_trip() {
        for fault in [
            Fault::divide_by_zero(),
            Fault::malformed("operand1 is not a number"),
            Fault::new(FaultKind::InvalidOperation, "Unknown operation: '99'"),
            Fault::unavailable("connection refused"),
        ] {
            let status = Status::from(fault.clone());
            assert_eq!(status.code(), code_for_kind(fault.kind()));
            assert_eq!(Fault::from_status(&status), fault);
        }
    }

    #[test]
    fn test_untagged_status_uses_code() {
        let fault = Fault::from_status(&Status::unimplemented(""));
        assert_eq!(fault.kind(), FaultKind::InvalidOperation);
        assert!(fault.message().contains("Unimplemented"));

        let fault = Fault::from_status(&Status::out_of_range("operand"));
        assert_eq!(fault.kind(), FaultKind::MalformedRequest);

        let fault = Fault::from_status(&Status::deadline_exceeded("timeout"));
        assert_eq!(fault.kind(), FaultKind::TransportUnavailable);

        let fault = Fault::from_status(&Status::unknown("transport error"));
        assert_eq!(fault.kind(), FaultKind::TransportUnavailable);
    }

    #[test]
    fn test_undecodable_reply_is_transport_fault() {
        let status = Status::internal("failed to decode Protobuf message: invalid wire type");
        let fault = Fault::from_status(&status);
        assert_eq!(fault.kind(), FaultKind::TransportUnavailable);
        assert!(fault.is_transport());

        // A tagged INTERNAL keeps its tag
        let mut status = Status::internal("bad");
        status.metadata_mut().insert(
            FAULT_KIND_METADATA_KEY,
            MetadataValue::from_static("malformed_request"),
        );
        assert_eq!(
            Fault::from_status(&status).kind(),
            FaultKind::MalformedRequest
        );
    }

    #[test]
    fn test_unknown_tag_falls_back_to_code() {
        let mut status = Status::invalid_argument("bad");
        status.metadata_mut().insert(
            FAULT_KIND_METADATA_KEY,
            MetadataValue::from_static("overflow"),
        );
        assert_eq!(
            Fault::from_status(&status).kind(),
            FaultKind::MalformedRequest
        );
    }
}
