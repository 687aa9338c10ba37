pub mod client;
pub mod config;
pub mod error;
pub mod gateway;
pub mod query_step;
pub mod result;
pub mod sdk;

mod poll;
mod submit;
mod wait;


pub use client::{AthenaClient, DEFAULT_DESCRIPTION};
pub use config::{AthenaConfig, ClientOptions, QueryOptions};
pub use error::{AthenaError, GatewayError};
pub use gateway::{
    ExecutionState, QueryGateway, ResultPage, StatusReport, SubmitOutput, SubmitRequest,
};
pub use lakequery_core::Record;
pub use query_step::{QueryStep, QueryStepParams, SqlProducer, StepMode, StepOutput};
pub use result::{parse_page, HeaderState, ResultReader};
pub use sdk::AwsAthenaGateway;
pub use tokio_util::sync::CancellationToken;
