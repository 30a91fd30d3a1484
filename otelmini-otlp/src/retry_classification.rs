//! Classification of transport failures into retryable and fatal, per the
//! OTLP specification.

use otelmini::retry::AttemptOutcome;

/// Classify an HTTP response status for one export attempt.
///
/// `200` is success; `429`, `502`, `503` and `504` are retryable; everything
/// else (including transport errors, handled by the caller) is fatal.
pub fn classify_http_status(status: u16) -> AttemptOutcome {
    match status {
        200 => AttemptOutcome::Success,
        429 | 502 | 503 | 504 => AttemptOutcome::Retry,
        _ => AttemptOutcome::Failure,
    }
}

/// Classify a gRPC status code for one export attempt.
///
/// The retryable set follows the OTLP specification:
/// `CANCELLED, DEADLINE_EXCEEDED, RESOURCE_EXHAUSTED, ABORTED, OUT_OF_RANGE,
/// UNAVAILABLE, DATA_LOSS`.
#[cfg(feature = "grpc-tonic")]
#[cfg_attr(docsrs, doc(cfg(feature = "grpc-tonic")))]
pub fn classify_tonic_code(code: tonic::Code) -> AttemptOutcome {
    match code {
        tonic::Code::Cancelled
        | tonic::Code::DeadlineExceeded
        | tonic::Code::ResourceExhausted
        | tonic::Code::Aborted
        | tonic::Code::OutOfRange
        | tonic::Code::Unavailable
        | tonic::Code::DataLoss => AttemptOutcome::Retry,
        _ => AttemptOutcome::Failure,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_classification() {
        assert_eq!(classify_http_status(200), AttemptOutcome::Success);
        for status in [429, 502, 503, 504] {
            assert_eq!(classify_http_status(status), AttemptOutcome::Retry);
        }
        for status in [201, 400, 401, 404, 500, 501] {
            assert_eq!(classify_http_status(status), AttemptOutcome::Failure);
        }
    }

    #[cfg(feature = "grpc-tonic")]
    #[test]
    fn unavailable_then_success_backs_off_and_recovers() {
        use otelmini::retry::{Retrier, RetryResult};
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::{Arc, Mutex};
        use std::time::Duration;

        let sleeps = Arc::new(Mutex::new(Vec::new()));
        let recorded = sleeps.clone();
        let retrier = Retrier::new(4).with_sleep(move |d| recorded.lock().unwrap().push(d));

        // the collector is unavailable for three attempts, then recovers
        let attempts = AtomicUsize::new(0);
        let result = retrier.retry(|| {
            if attempts.fetch_add(1, Ordering::SeqCst) < 3 {
                classify_tonic_code(tonic::Code::Unavailable)
            } else {
                AttemptOutcome::Success
            }
        });

        assert_eq!(result, RetryResult::Success);
        assert_eq!(attempts.load(Ordering::SeqCst), 4);
        assert_eq!(
            *sleeps.lock().unwrap(),
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4),
            ]
        );
    }

    #[cfg(feature = "grpc-tonic")]
    #[test]
    fn grpc_classification() {
        use tonic::Code;
        for code in [
            Code::Cancelled,
            Code::DeadlineExceeded,
            Code::ResourceExhausted,
            Code::Aborted,
            Code::OutOfRange,
            Code::Unavailable,
            Code::DataLoss,
        ] {
            assert_eq!(classify_tonic_code(code), AttemptOutcome::Retry);
        }
        for code in [
            Code::Unknown,
            Code::InvalidArgument,
            Code::NotFound,
            Code::PermissionDenied,
            Code::Unimplemented,
            Code::Internal,
            Code::Unauthenticated,
        ] {
            assert_eq!(classify_tonic_code(code), AttemptOutcome::Failure);
        }
    }
}
