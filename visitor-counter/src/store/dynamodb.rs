use {
    std::collections::HashMap,
    tracing::debug,
    futures::future::{BoxFuture, FutureExt},
    aws_config::BehaviorVersion,
    aws_sdk_dynamodb::{
        Client,
        error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
        operation::update_item::UpdateItemError,
        types::{AttributeValue, ReturnValue},
    },
    visitor_counter_core::{COUNT_ATTRIBUTE, PARTITION_KEY_ATTRIBUTE},
    crate::{error::StoreError, store::CounterStore},
};

const UPDATE_EXPRESSION: &str = "SET #c = if_not_exists(#c, :zero) + :one";

/// Counter kept in a DynamoDB table. The increment is a single `UpdateItem` call,
/// so DynamoDB serializes concurrent increments of the same item.
///
/// The client is cheap to clone and safe to share between concurrent invocations.
#[derive(Clone)]
pub struct DynamoDbStore {
    client: Client,
    table_name: String,
}

impl DynamoDbStore {
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    /// Region and credentials come from the standard AWS environment chain.
    pub async fn from_env(table_name: impl Into<String>) -> Self {
        let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        Self::new(Client::new(&config), table_name)
    }
}

impl CounterStore for DynamoDbStore {
    fn increment<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<u64, StoreError>> {
        async move {
            debug!(table = self.table_name.as_str(), key, "sending UpdateItem");

            let output = self.client.update_item()
                .table_name(&self.table_name)
                .key(PARTITION_KEY_ATTRIBUTE, AttributeValue::S(key.to_owned()))
                .update_expression(UPDATE_EXPRESSION)
                .expression_attribute_names("#c", COUNT_ATTRIBUTE)
                .expression_attribute_values(":zero", AttributeValue::N("0".to_owned()))
                .expression_attribute_values(":one", AttributeValue::N("1".to_owned()))
                .return_values(ReturnValue::UpdatedNew)
                .send()
                .await
                .map_err(classify_error)?;

            parse_count(output.attributes())
        }.boxed()
    }
}

fn classify_error(err: SdkError<UpdateItemError>) -> StoreError {
    let reason = DisplayErrorContext(&err).to_string();

    match &err {
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => return StoreError::Unreachable { reason },
        SdkError::ConstructionFailure(_) => return StoreError::InvalidRequest { reason },
        _ => {},
    }

    let err = err.into_service_error();
    if err.is_resource_not_found_exception() {
        return StoreError::TableNotFound { reason };
    }
    if err.is_provisioned_throughput_exceeded_exception() || err.is_request_limit_exceeded() {
        return StoreError::Throttled { reason };
    }

    match err.code() {
        Some("AccessDeniedException")
        | Some("UnrecognizedClientException")
        | Some("MissingAuthenticationTokenException")
        | Some("ExpiredTokenException") => StoreError::AccessDenied { reason },
        Some("ThrottlingException") => StoreError::Throttled { reason },
        Some("ValidationException") => StoreError::InvalidRequest { reason },
        _ => StoreError::Rejected { reason },
    }
}

fn parse_count(attributes: Option<&HashMap<String, AttributeValue>>) -> Result<u64, StoreError> {
    let value = attributes
        .and_then(|attributes| attributes.get(COUNT_ATTRIBUTE))
        .ok_or_else(|| StoreError::MissingAttribute { attribute: COUNT_ATTRIBUTE.to_owned() })?;

    let value = value.as_n()
        .map_err(|other| StoreError::MalformedCount { reason: format!("expected number attribute, got: {other:?}") })?;

    value.parse::<u64>()
        .map_err(|err| StoreError::MalformedCount { reason: format!("{value:?} is not a non-negative integer: {err}") })
}

#[cfg(test)]
mod tests {
    use {
        aws_sdk_dynamodb::{
            config::http::HttpResponse,
            error::ErrorMetadata,
            types::error::ResourceNotFoundException,
        },
        aws_smithy_types::body::SdkBody,
        super::*,
    };

    fn attributes(value: AttributeValue) -> HashMap<String, AttributeValue> {
        let mut attributes = HashMap::new();
        attributes.insert(COUNT_ATTRIBUTE.to_owned(), value);
        attributes
    }

    #[test]
    fn parses_updated_count() {
        let attributes = attributes(AttributeValue::N("17".to_owned()));
        assert_eq!(Ok(17), parse_count(Some(&attributes)));
    }

    #[test]
    fn missing_attributes_are_an_error() {
        let expected = Err(StoreError::MissingAttribute { attribute: "count".to_owned() });
        assert_eq!(expected, parse_count(None));
        assert_eq!(expected, parse_count(Some(&HashMap::new())));
    }

    #[test]
    fn non_numeric_attribute_is_malformed() {
        let attributes = attributes(AttributeValue::S("17".to_owned()));
        match parse_count(Some(&attributes)) {
            Err(StoreError::MalformedCount { .. }) => {},
            other => panic!("expected malformed count, got: {other:?}"),
        }
    }

    #[test]
    fn fractional_negative_and_huge_counts_are_malformed() {
        for value in ["1.5", "-1", "18446744073709551616", ""] {
            let attributes = attributes(AttributeValue::N(value.to_owned()));
            match parse_count(Some(&attributes)) {
                Err(StoreError::MalformedCount { .. }) => {},
                other => panic!("expected malformed count for {value:?}, got: {other:?}"),
            }
        }
    }

    #[test]
    fn timeout_means_unreachable() {
        match classify_error(SdkError::timeout_error("request timed out")) {
            StoreError::Unreachable { .. } => {},
            other => panic!("expected unreachable error, got: {other:?}"),
        }
    }

    fn service_error(err: UpdateItemError) -> SdkError<UpdateItemError> {
        SdkError::service_error(err, HttpResponse::new(400u16.try_into().unwrap(), SdkBody::empty()))
    }

    fn error_with_code(code: &str) -> SdkError<UpdateItemError> {
        service_error(UpdateItemError::generic(ErrorMetadata::builder().code(code).message("rejected").build()))
    }

    #[test]
    fn missing_table_is_table_not_found() {
        let err = service_error(UpdateItemError::ResourceNotFoundException(
            ResourceNotFoundException::builder().message("Requested resource not found").build()
        ));
        match classify_error(err) {
            StoreError::TableNotFound { .. } => {},
            other => panic!("expected table not found error, got: {other:?}"),
        }
    }

    #[test]
    fn credential_errors_are_access_denied() {
        for code in ["AccessDeniedException", "UnrecognizedClientException", "ExpiredTokenException"] {
            match classify_error(error_with_code(code)) {
                StoreError::AccessDenied { .. } => {},
                other => panic!("expected access denied error for {code}, got: {other:?}"),
            }
        }
    }

    #[test]
    fn throttling_is_throttled() {
        match classify_error(error_with_code("ThrottlingException")) {
            StoreError::Throttled { .. } => {},
            other => panic!("expected throttled error, got: {other:?}"),
        }
    }

    #[test]
    fn validation_failure_is_invalid_request() {
        match classify_error(error_with_code("ValidationException")) {
            StoreError::InvalidRequest { .. } => {},
            other => panic!("expected invalid request error, got: {other:?}"),
        }
    }

    #[test]
    fn unknown_code_is_rejected() {
        match classify_error(error_with_code("InternalServerError")) {
            StoreError::Rejected { .. } => {},
            other => panic!("expected rejected error, got: {other:?}"),
        }
    }
}
