//! gRPC Server implementation for calculator
//!
//! The server implementation handles gRPC requests and delegates
//! to the domain Service for business logic. The same service answers
//! native gRPC and, behind the gRPC-Web layer, browser clients.

use std::sync::Arc;

use tonic::{Request, Response, Status};

use calculator_sdk::{CalculateReply, CalculateRequest, CalculatorService, Fault, Operation};

use crate::domain::Service;

/// gRPC service implementation that wraps the domain Service.
#[derive(Clone)]
pub struct CalculatorServiceImpl {
    service: Arc<Service>,
}

impl CalculatorServiceImpl {
    /// Create a new CalculatorService implementation with the given Service.
    #[must_use]
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }

    fn handle(
        &self,
        op: Operation,
        request: Request<CalculateRequest>,
    ) -> Result<Response<CalculateReply>, Status> {
        let req = request.into_inner();
        let a = validate_operand("operand1", req.operand1)?;
        let b = validate_operand("operand2", req.operand2)?;

        let result = self.service.calculate(op, a, b)?;
        Ok(Response::new(CalculateReply {
            result: Some(result),
        }))
    }
}

fn validate_operand(name: &str, value: Option<f64>) -> Result<f64, Fault> {
    let value = value.ok_or_else(|| Fault::malformed(format!("{name} is required")))?;
    if value.is_finite() {
        Ok(value)
    } else {
        let msg = format!("{name} must be a finite number, got {value}");
        Err(Fault::malformed(msg))
    }
}

#[tonic::async_trait]
impl CalculatorService for CalculatorServiceImpl {
    async fn add(
        &self,
        request: Request<CalculateRequest>,
    ) -> Result<Response<CalculateReply>, Status> {
        self.handle(Operation::Add, request)
    }

    async fn subtract(
        &self,
        request: Request<CalculateRequest>,
    ) -> Result<Response<CalculateReply>, Status> {
        self.handle(Operation::Subtract, request)
    }

    async fn multiply(
        &self,
        request: Request<CalculateRequest>,
    ) -> Result<Response<CalculateReply>, Status> {
        self.handle(Operation::Multiply, request)
    }

    async fn divide(
        &self,
        request: Request<CalculateRequest>,
    ) -> Result<Response<CalculateReply>, Status> {
        self.handle(Operation::Divide, request)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
#[allow(clippy::float_cmp)]
mod tests {
    use calculator_sdk::{FAULT_KIND_METADATA_KEY, FaultKind};
    use tonic::Code;

    use super::*;

    fn svc() -> CalculatorServiceImpl {
        CalculatorServiceImpl::new(Arc::new(Service::new()))
    }

    fn req(a: f64, b: f64) -> Request<CalculateRequest> {
        Request::new(CalculateRequest {
            operand1: Some(a),
            operand2: Some(b),
        })
    }

    fn result(response: Result<Response<CalculateReply>, Status>) -> f64 {
        response.unwrap().into_inner().result.unwrap()
    }

    #[tokio::test]
    async fn test_four_operations() {
        let svc = svc();
        assert_eq!(result(svc.add(req(2.0, 3.0)).await), 5.0);
        assert_eq!(result(svc.subtract(req(10.0, 4.0)).await), 6.0);
        assert_eq!(result(svc.multiply(req(-2.0, 5.0)).await), -10.0);
        assert_eq!(result(svc.divide(req(10.0, 2.0)).await), 5.0);
    }

    #[tokio::test]
    async fn test_negative_zero_result_keeps_sign() {
        let value = result(svc().multiply(req(-1.0, 0.0)).await);
        assert_eq!(value.to_bits(), (-0.0_f64).to_bits());
    }

    #[tokio::test]
    async fn test_missing_operand_is_malformed() {
        let request = Request::new(CalculateRequest {
            operand1: Some(1.0),
            operand2: None,
        });
        let status = svc().add(request).await.unwrap_err();
        assert_eq!(status.code(), Code::InvalidArgument);
        assert_eq!(status.message(), "operand2 is required");
        assert_eq!(
            Fault::from_status(&status).kind(),
            FaultKind::MalformedRequest
        );
    }

    #[tokio::test]
    async fn test_divide_by_zero_status() {
        let status = svc().divide(req(7.0, 0.0)).await.unwrap_err();
        assert_eq!(status.code(), Code::InvalidArgument);
        assert_eq!(status.message(), "Cannot divide by zero");
        assert_eq!(
            status.metadata().get(FAULT_KIND_METADATA_KEY).unwrap(),
            FaultKind::DivideByZero.as_str()
        );
    }

    #[tokio::test]
    async fn test_non_finite_operand_is_malformed() {
        for (a, b) in [
            (f64::NAN, 1.0),
            (1.0, f64::INFINITY),
            (f64::NEG_INFINITY, 0.0),
        ] {
            let status = svc().add(req(a, b)).await.unwrap_err();
            assert_eq!(status.code(), Code::InvalidArgument);
            assert_eq!(
                Fault::from_status(&status).kind(),
                FaultKind::MalformedRequest
            );
        }
    }
}
