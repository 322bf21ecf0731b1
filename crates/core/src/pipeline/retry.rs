use super::writer::BundleWriter;
use super::{PipelineError, PipelineResult};
use crate::bundle::Bundle;
use crate::config::RetryPolicy;
use std::thread;

/// Wraps a writer and retries transient failures with a fixed backoff.
///
/// Permanent failures (invalid input, serialization) are returned on the first attempt. Once the
/// policy's attempts are used up the last error is returned inside
/// [`PipelineError::RetriesExhausted`].
#[derive(Debug)]
pub struct RetryingWriter<W> {
    inner: W,
    policy: RetryPolicy,
}

impl<W: BundleWriter> RetryingWriter<W> {
    pub fn new(inner: W, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn inner(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: BundleWriter> BundleWriter for RetryingWriter<W> {
    fn write(&mut self, bundle: &Bundle) -> PipelineResult<()> {
        let max_attempts = self.policy.max_attempts();
        let mut attempt = 1;

        loop {
            let err = match self.inner.write(bundle) {
                Ok(()) => return Ok(()),
                Err(err) => err,
            };

            if !err.is_transient() {
                return Err(err);
            }
            if attempt >= max_attempts {
                return Err(PipelineError::RetriesExhausted {
                    attempts: attempt,
                    source: Box::new(err),
                });
            }

            tracing::warn!(
                bundle = bundle.id(),
                attempt,
                max_attempts,
                error = %err,
                "bundle write failed, retrying"
            );
            thread::sleep(self.policy.backoff());
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::BundleBuilder;
    use std::io;
    use std::time::Duration;

    /// Fails the first `failures` writes with the error produced by `make_error`.
    struct FlakyWriter {
        failures: u32,
        calls: u32,
        make_error: fn() -> PipelineError,
    }

    impl FlakyWriter {
        fn new(failures: u32, make_error: fn() -> PipelineError) -> Self {
            Self {
                failures,
                calls: 0,
                make_error,
            }
        }
    }

    impl BundleWriter for FlakyWriter {
        fn write(&mut self, _bundle: &Bundle) -> PipelineResult<()> {
            self.calls += 1;
            if self.calls <= self.failures {
                return Err((self.make_error)());
            }
            Ok(())
        }
    }

    fn io_error() -> PipelineError {
        PipelineError::io("out/bundle_1.json", io::Error::other("disk busy"))
    }

    fn invalid_error() -> PipelineError {
        PipelineError::InvalidInput {
            path: "out/individuals.json".into(),
            message: "not an array".into(),
        }
    }

    fn policy(attempts: u32) -> RetryPolicy {
        RetryPolicy::new(attempts, Duration::ZERO).expect("valid policy")
    }

    fn bundle() -> Bundle {
        BundleBuilder::new().id("b-1").build().expect("build bundle")
    }

    #[test]
    fn recovers_from_transient_failures() {
        let mut writer = RetryingWriter::new(FlakyWriter::new(2, io_error), policy(3));
        writer.write(&bundle()).expect("third attempt succeeds");
        assert_eq!(writer.inner().calls, 3);
    }

    #[test]
    fn gives_up_after_max_attempts() {
        let mut writer = RetryingWriter::new(FlakyWriter::new(u32::MAX, io_error), policy(3));
        let err = writer.write(&bundle()).expect_err("should exhaust retries");
        match err {
            PipelineError::RetriesExhausted { attempts, source } => {
                assert_eq!(attempts, 3);
                assert!(matches!(*source, PipelineError::Io { .. }));
            }
            other => panic!("expected RetriesExhausted, got {other:?}"),
        }
        assert_eq!(writer.into_inner().calls, 3);
    }

    #[test]
    fn permanent_failures_are_not_retried() {
        let mut writer = RetryingWriter::new(FlakyWriter::new(1, invalid_error), policy(5));
        let err = writer.write(&bundle()).expect_err("should fail at once");
        assert!(matches!(err, PipelineError::InvalidInput { .. }));
        assert_eq!(writer.inner().calls, 1);
    }
}
