//! Downstream transform
//!
//! After a successful run the warehouse is asked to transform the freshly
//! loaded data by calling a stored procedure keyed by job name. Talking to
//! the warehouse is someone else's job: statements are handed to a
//! [`StatementSink`].

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

/// Default stored procedure invoked after a run
pub const DEFAULT_PROCEDURE: &str = "SCHEMA.USP_TRANSFORM_DATA";

/// A step triggered once jobs have completed
#[async_trait]
pub trait DownstreamTransform: Send + Sync {
    /// Run the transform for `job_name` (empty for repository runs)
    async fn invoke(&self, job_name: &str) -> Result<()>;
}

/// Destination for rendered procedure calls
pub trait StatementSink: Send + Sync {
    fn execute(&self, statement: &str) -> Result<()>;
}

/// Sink that records statements in the run log
pub struct LogStatementSink;

impl StatementSink for LogStatementSink {
    fn execute(&self, statement: &str) -> Result<()> {
        info!(statement, "Issued transform statement");
        Ok(())
    }
}

/// Calls a stored procedure with the job name as its only argument
pub struct ProcedureTransform<S> {
    procedure: String,
    sink: S,
}

impl<S: StatementSink> ProcedureTransform<S> {
    pub fn new(procedure: impl Into<String>, sink: S) -> Self {
        Self {
            procedure: procedure.into(),
            sink,
        }
    }

    /// Render the call statement for `job_name`
    pub fn statement(&self, job_name: &str) -> String {
        format!("CALL {}('{}')", self.procedure, job_name.replace('\'', "''"))
    }
}

#[async_trait]
impl<S: StatementSink> DownstreamTransform for ProcedureTransform<S> {
    async fn invoke(&self, job_name: &str) -> Result<()> {
        let statement = self.statement(job_name);
        self.sink.execute(&statement)?;

        info!(procedure = %self.procedure, job_name, "Transform statement issued");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct RecordingSink {
        statements: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingSink {
        fn new() -> (Self, Arc<Mutex<Vec<String>>>) {
            let statements = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    statements: statements.clone(),
                },
                statements,
            )
        }
    }

    impl StatementSink for RecordingSink {
        fn execute(&self, statement: &str) -> Result<()> {
            self.statements.lock().unwrap().push(statement.to_string());
            Ok(())
        }
    }

    struct FailingSink;

    impl StatementSink for FailingSink {
        fn execute(&self, _statement: &str) -> Result<()> {
            anyhow::bail!("warehouse unavailable")
        }
    }

    #[test]
    fn test_statement() {
        let transform = ProcedureTransform::new(DEFAULT_PROCEDURE, LogStatementSink);
        assert_eq!(
            transform.statement("orders"),
            "CALL SCHEMA.USP_TRANSFORM_DATA('orders')"
        );
        assert_eq!(
            transform.statement(""),
            "CALL SCHEMA.USP_TRANSFORM_DATA('')"
        );
    }

    #[test]
    fn test_statement_escapes_quotes() {
        let transform = ProcedureTransform::new("ETL.RUN", LogStatementSink);
        assert_eq!(
            transform.statement("o'brien'); DROP TABLE x; --"),
            "CALL ETL.RUN('o''brien''); DROP TABLE x; --')"
        );
    }

    #[tokio::test]
    async fn test_invoke_hands_statement_to_sink() {
        let (sink, statements) = RecordingSink::new();
        let transform = ProcedureTransform::new(DEFAULT_PROCEDURE, sink);

        transform.invoke("orders").await.unwrap();

        let statements = statements.lock().unwrap();
        assert_eq!(
            statements.as_slice(),
            ["CALL SCHEMA.USP_TRANSFORM_DATA('orders')"]
        );
    }

    #[tokio::test]
    async fn test_invoke_propagates_sink_errors() {
        let transform = ProcedureTransform::new(DEFAULT_PROCEDURE, FailingSink);
        let err = transform.invoke("orders").await.unwrap_err();
        assert!(err.to_string().contains("warehouse unavailable"));
    }
}
