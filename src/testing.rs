//! Testing utilities for provider implementations.
//!
//! [`MockManagementServer`] is an in-memory stand-in for the management API
//! that implements [`ApiClient`], and [`ProviderTester`] drives a
//! [`ProviderService`] through host-like lifecycles without a real host.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use checkpoint_provider::testing::{MockManagementServer, ProviderTester};
//! use checkpoint_provider::CheckpointProvider;
//! use serde_json::json;
//!
//! #[tokio::test]
//! async fn test_create_site() {
//!     let server = Arc::new(MockManagementServer::new());
//!     let tester = ProviderTester::new(CheckpointProvider::new(server.clone()));
//!
//!     let state = tester
//!         .lifecycle_create("checkpoint_management_application_site", json!({"name": "App1"}))
//!         .await
//!         .unwrap();
//!
//!     assert_eq!(state["color"], "black");
//! }
//! ```

use std::collections::{BTreeMap, HashMap, VecDeque};

use serde_json::{json, Map, Value};
use tokio::sync::Mutex;

use crate::client::{ApiClient, ApiResponse, OBJECT_NOT_FOUND_CODE};
use crate::error::ProviderError;
use crate::provider::ProviderService;
use crate::schema::{Diagnostic, DiagnosticSeverity, ProviderSchema};
use crate::types::{ImportedResource, PlanResult};

const SET_KEYS: [&str; 4] = ["additional-categories", "tags", "url-list", "groups"];
const SCALAR_KEYS: [&str; 6] = [
    "description",
    "primary-category",
    "application-signature",
    "urls-defined-as-regular-expression",
    "color",
    "comments",
];

/// A command received by [`MockManagementServer`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// The command name.
    pub command: String,
    /// The payload exactly as sent.
    pub payload: Value,
    /// The session the call ran in.
    pub session_id: String,
    /// The wait-for-task flag.
    pub wait_for_task: bool,
    /// The proxy flag.
    pub use_proxy: bool,
}

#[derive(Default)]
struct ServerState {
    objects: BTreeMap<String, Map<String, Value>>,
    next_uid: u64,
    calls: Vec<RecordedCall>,
    scripted: HashMap<String, VecDeque<ApiResponse>>,
    transport_failures: VecDeque<String>,
}

/// In-memory management server for application sites.
///
/// It assigns uids, enforces unique names, fills server defaults, stores set
/// members as `{name, uid}` objects (the URL list as bare strings), applies
/// `remove`/`add` instructions and renames, and answers unknown uids with the
/// not-found error code. Every call is recorded. Responses can be scripted per
/// command and transport failures injected.
pub struct MockManagementServer {
    session_id: String,
    default_primary_category: String,
    state: Mutex<ServerState>,
}

impl Default for MockManagementServer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockManagementServer {
    /// Create an empty server.
    pub fn new() -> Self {
        Self {
            session_id: "mock-session".to_string(),
            default_primary_category: "Custom_Application_Site".to_string(),
            state: Mutex::new(ServerState::default()),
        }
    }

    /// Use `category` when an object is added without a primary category.
    pub fn with_default_primary_category(mut self, category: impl Into<String>) -> Self {
        self.default_primary_category = category.into();
        self
    }

    /// Report `session_id` as the client's session.
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }

    /// Answer the next `command` with `response` instead of simulating it.
    pub async fn respond_to(&self, command: &str, response: ApiResponse) {
        self.state
            .lock()
            .await
            .scripted
            .entry(command.to_string())
            .or_default()
            .push_back(response);
    }

    /// Fail the next call, whatever its command, with a transport error.
    pub async fn fail_next_call(&self, message: impl Into<String>) {
        self.state
            .lock()
            .await
            .transport_failures
            .push_back(message.into());
    }

    /// All calls received so far.
    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().await.calls.clone()
    }

    /// Forget the recorded calls.
    pub async fn clear_calls(&self) {
        self.state.lock().await.calls.clear();
    }

    /// The stored objects keyed by uid.
    pub async fn objects(&self) -> BTreeMap<String, Value> {
        self.state
            .lock()
            .await
            .objects
            .iter()
            .map(|(uid, object)| (uid.clone(), Value::Object(object.clone())))
            .collect()
    }

    /// Delete an object behind the provider's back.
    pub async fn remove_object(&self, uid: &str) -> bool {
        self.state.lock().await.objects.remove(uid).is_some()
    }

    fn simulate(&self, state: &mut ServerState, command: &str, payload: &Value) -> ApiResponse {
        let Some(payload) = payload.as_object() else {
            return ApiResponse::failure("generic_err_invalid_syntax", "Payload must be an object");
        };
        match command {
            "add-application-site" => self.add(state, payload),
            "show-application-site" => match find(state, payload) {
                Some(uid) => ApiResponse::ok(Value::Object(state.objects[&uid].clone())),
                None => not_found(payload),
            },
            "set-application-site" => set(state, payload),
            "delete-application-site" => match find(state, payload) {
                Some(uid) => {
                    state.objects.remove(&uid);
                    ApiResponse::ok(json!({"message": "OK"}))
                },
                None => not_found(payload),
            },
            other => ApiResponse::failure(
                "generic_err_command_not_found",
                format!("Unknown command \"{}\"", other),
            ),
        }
    }

    fn add(&self, state: &mut ServerState, payload: &Map<String, Value>) -> ApiResponse {
        let Some(name) = payload.get("name").and_then(Value::as_str) else {
            return ApiResponse::failure(
                "generic_err_missing_required_parameters",
                "Missing parameter: [name]",
            );
        };
        if name_taken(state, name, None) {
            return duplicate_name(name);
        }

        let mut object = Map::new();
        object.insert("name".to_string(), json!(name));
        object.insert("type".to_string(), json!("application-site"));
        object.insert("color".to_string(), json!("black"));
        object.insert(
            "primary-category".to_string(),
            json!(self.default_primary_category),
        );
        object.insert("urls-defined-as-regular-expression".to_string(), json!(false));
        object.insert("tags".to_string(), json!([]));
        object.insert("groups".to_string(), json!([]));

        if let Err(response) = apply_fields(&mut object, payload) {
            return response;
        }

        state.next_uid += 1;
        let uid = format!("{:08x}-a11c-4e57-9b0d-{:012x}", state.next_uid, state.next_uid);
        object.insert("uid".to_string(), json!(uid));
        state.objects.insert(uid, object.clone());
        ApiResponse::ok(Value::Object(object))
    }
}

#[async_trait::async_trait]
impl ApiClient for MockManagementServer {
    async fn api_call(
        &self,
        command: &str,
        payload: Value,
        session_id: &str,
        wait_for_task: bool,
        use_proxy: bool,
    ) -> Result<ApiResponse, ProviderError> {
        let mut state = self.state.lock().await;
        state.calls.push(RecordedCall {
            command: command.to_string(),
            payload: payload.clone(),
            session_id: session_id.to_string(),
            wait_for_task,
            use_proxy,
        });

        if let Some(message) = state.transport_failures.pop_front() {
            return Err(ProviderError::Transport(message));
        }
        if let Some(response) = state
            .scripted
            .get_mut(command)
            .and_then(VecDeque::pop_front)
        {
            return Ok(response);
        }
        Ok(self.simulate(&mut state, command, &payload))
    }

    fn session_id(&self) -> String {
        self.session_id.clone()
    }
}

fn find(state: &ServerState, payload: &Map<String, Value>) -> Option<String> {
    if let Some(uid) = payload.get("uid").and_then(Value::as_str) {
        return state.objects.contains_key(uid).then(|| uid.to_string());
    }
    let name = payload.get("name").and_then(Value::as_str)?;
    state
        .objects
        .iter()
        .find(|(_, object)| object.get("name").and_then(Value::as_str) == Some(name))
        .map(|(uid, _)| uid.clone())
}

fn name_taken(state: &ServerState, name: &str, except: Option<&str>) -> bool {
    state.objects.iter().any(|(uid, object)| {
        Some(uid.as_str()) != except && object.get("name").and_then(Value::as_str) == Some(name)
    })
}

fn set(state: &mut ServerState, payload: &Map<String, Value>) -> ApiResponse {
    let Some(uid) = find(state, payload) else {
        return not_found(payload);
    };
    let mut object = state.objects[&uid].clone();
    if let Some(new_name) = payload.get("new-name") {
        let Some(new_name) = new_name.as_str() else {
            return invalid("new-name");
        };
        if name_taken(state, new_name, Some(uid.as_str())) {
            return duplicate_name(new_name);
        }
        object.insert("name".to_string(), json!(new_name));
    }
    if let Err(response) = apply_fields(&mut object, payload) {
        return response;
    }
    state.objects.insert(uid, object.clone());
    ApiResponse::ok(Value::Object(object))
}

fn apply_fields(
    object: &mut Map<String, Value>,
    payload: &Map<String, Value>,
) -> Result<(), ApiResponse> {
    for key in SCALAR_KEYS {
        if let Some(value) = payload.get(key) {
            let valid = if key == "urls-defined-as-regular-expression" {
                value.is_boolean()
            } else {
                value.is_string()
            };
            if !valid {
                return Err(invalid(key));
            }
            object.insert(key.to_string(), value.clone());
        }
    }
    for key in SET_KEYS {
        let Some(value) = payload.get(key) else {
            continue;
        };
        let mut members = member_names(object.get(key));
        match value {
            Value::Array(_) => members = names_of(value).ok_or_else(|| invalid(key))?,
            Value::Object(instruction) => {
                if let Some(add) = instruction.get("add") {
                    members.extend(names_of(add).ok_or_else(|| invalid(key))?);
                }
                if let Some(remove) = instruction.get("remove") {
                    let remove = names_of(remove).ok_or_else(|| invalid(key))?;
                    members.retain(|m| !remove.contains(m));
                }
            },
            _ => return Err(invalid(key)),
        }
        object.insert(key.to_string(), encode_members(key, members));
    }
    Ok(())
}

fn names_of(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|v| v.as_str().map(str::to_string))
        .collect()
}

fn member_names(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| match item {
                    Value::String(name) => Some(name.clone()),
                    other => other.get("name").and_then(Value::as_str).map(str::to_string),
                })
                .collect()
        })
        .unwrap_or_default()
}

fn encode_members(key: &str, mut members: Vec<String>) -> Value {
    members.sort();
    members.dedup();
    if key == "url-list" {
        return json!(members);
    }
    Value::Array(
        members
            .into_iter()
            .map(|name| json!({"name": name, "uid": format!("{}-{}", key, name)}))
            .collect(),
    )
}

fn not_found(payload: &Map<String, Value>) -> ApiResponse {
    let target = payload
        .get("uid")
        .or_else(|| payload.get("name"))
        .and_then(Value::as_str)
        .unwrap_or_default();
    ApiResponse::failure(
        OBJECT_NOT_FOUND_CODE,
        format!("Requested object [{}] not found", target),
    )
}

fn duplicate_name(name: &str) -> ApiResponse {
    ApiResponse::failure(
        "err_validation_failed",
        format!("More than one object named '{}' exists.", name),
    )
}

fn invalid(key: &str) -> ApiResponse {
    ApiResponse::failure(
        "generic_err_invalid_parameter",
        format!("Invalid parameter for [{}]", key),
    )
}

/// A test harness for provider implementations.
///
/// Wraps a [`ProviderService`] and exposes lifecycle helpers that chain
/// plan, apply and read the way a host would.
pub struct ProviderTester<P: ProviderService> {
    provider: P,
}

impl<P: ProviderService> ProviderTester<P> {
    /// Create a new tester for the given provider.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Get a reference to the underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Get the provider's schema.
    pub fn schema(&self) -> ProviderSchema {
        self.provider.schema()
    }

    /// Get the list of resource type names.
    pub fn resource_types(&self) -> Vec<String> {
        self.provider.metadata().resources
    }

    /// Configure the provider, failing on error diagnostics.
    pub async fn configure(&self, config: Value) -> Result<(), TestError> {
        let diagnostics = self.provider.configure(config).await?;
        check_diagnostics(diagnostics)
    }

    /// Validate a resource configuration, failing on error diagnostics.
    pub async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<(), TestError> {
        let diagnostics = self
            .provider
            .validate_resource_config(resource_type, config)
            .await?;
        check_diagnostics(diagnostics)
    }

    /// Plan a resource creation (no prior state).
    pub async fn plan_create(
        &self,
        resource_type: &str,
        proposed_state: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider.plan(resource_type, None, proposed_state).await
    }

    /// Plan a resource update.
    pub async fn plan_update(
        &self,
        resource_type: &str,
        prior_state: Value,
        proposed_state: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider
            .plan(resource_type, Some(prior_state), proposed_state)
            .await
    }

    /// Plan a resource deletion.
    pub async fn plan_delete(
        &self,
        resource_type: &str,
        prior_state: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider
            .plan(resource_type, Some(prior_state), Value::Null)
            .await
    }

    /// Read the current state of a resource.
    pub async fn read(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<Value, ProviderError> {
        self.provider.read(resource_type, current_state).await
    }

    /// Import an existing resource.
    pub async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        self.provider.import_resource(resource_type, id).await
    }

    /// Run a full create lifecycle: plan → create → read.
    pub async fn lifecycle_create(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        let plan = self.plan_create(resource_type, config).await?;
        let created = self.provider.create(resource_type, plan.planned_state).await?;
        self.read(resource_type, created).await
    }

    /// Run a full update lifecycle: plan → update → read.
    pub async fn lifecycle_update(
        &self,
        resource_type: &str,
        prior_state: Value,
        proposed_state: Value,
    ) -> Result<Value, ProviderError> {
        let plan = self
            .plan_update(resource_type, prior_state.clone(), proposed_state)
            .await?;
        let updated = self
            .provider
            .update(resource_type, prior_state, plan.planned_state)
            .await?;
        self.read(resource_type, updated).await
    }

    /// Run a full delete lifecycle: plan → delete.
    pub async fn lifecycle_delete(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<(), ProviderError> {
        self.plan_delete(resource_type, current_state.clone()).await?;
        self.provider.delete(resource_type, current_state).await
    }

    /// Run create → update → delete and return the state after the update.
    pub async fn lifecycle_crud(
        &self,
        resource_type: &str,
        initial_config: Value,
        updated_config: Value,
    ) -> Result<Value, ProviderError> {
        let created = self.lifecycle_create(resource_type, initial_config).await?;
        let updated = self
            .lifecycle_update(resource_type, created, updated_config)
            .await?;
        self.lifecycle_delete(resource_type, updated.clone()).await?;
        Ok(updated)
    }
}

/// Error type for test operations that may fail with diagnostics.
#[derive(Debug)]
pub enum TestError {
    /// The operation failed with diagnostics.
    Diagnostics(Vec<Diagnostic>),
    /// The operation failed with a provider error.
    Provider(ProviderError),
}

impl std::fmt::Display for TestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestError::Diagnostics(diags) => {
                writeln!(f, "Operation failed with {} diagnostic(s):", diags.len())?;
                for diag in diags {
                    write!(f, "  [{:?}] {}", diag.severity, diag.summary)?;
                    if let Some(attr) = &diag.attribute {
                        write!(f, " (at {})", attr)?;
                    }
                    writeln!(f)?;
                }
                Ok(())
            },
            TestError::Provider(e) => write!(f, "Provider error: {}", e),
        }
    }
}

impl std::error::Error for TestError {}

impl From<ProviderError> for TestError {
    fn from(e: ProviderError) -> Self {
        TestError::Provider(e)
    }
}

fn check_diagnostics(diagnostics: Vec<Diagnostic>) -> Result<(), TestError> {
    let errors: Vec<_> = diagnostics
        .into_iter()
        .filter(|d| matches!(d.severity, DiagnosticSeverity::Error))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(TestError::Diagnostics(errors))
    }
}

/// Assert that a plan has no changes.
///
/// # Panics
///
/// Panics if the plan has any changes.
pub fn assert_plan_no_changes(plan: &PlanResult) {
    assert!(
        plan.changes.is_empty(),
        "Expected no changes, but got {} change(s): {:?}",
        plan.changes.len(),
        plan.changes.iter().map(|c| &c.path).collect::<Vec<_>>()
    );
}

/// Assert that a plan updates in place.
///
/// # Panics
///
/// Panics if the plan requires replacement.
pub fn assert_plan_updates_in_place(plan: &PlanResult) {
    assert!(
        !plan.requires_replace,
        "Expected plan to update in place, but it requires replacement"
    );
}

/// Assert that a plan changes exactly the given attributes.
///
/// # Panics
///
/// Panics if the set of changed paths differs from `paths`.
pub fn assert_plan_changes_exactly(plan: &PlanResult, paths: &[&str]) {
    let mut changed: Vec<&str> = plan.changes.iter().map(|c| c.path.as_str()).collect();
    changed.sort_unstable();
    let mut expected = paths.to_vec();
    expected.sort_unstable();
    assert_eq!(changed, expected, "Plan changed unexpected attributes");
}

/// Assert that diagnostics contain an error with the given summary substring.
///
/// # Panics
///
/// Panics if no error diagnostic contains the given substring.
pub fn assert_error_contains(diagnostics: &[Diagnostic], substring: &str) {
    let has_matching_error = diagnostics
        .iter()
        .any(|d| d.is_error() && d.summary.contains(substring));

    assert!(
        has_matching_error,
        "Expected an error containing '{}', but no matching error found. Errors: {:?}",
        substring,
        diagnostics
            .iter()
            .filter(|d| d.is_error())
            .map(|d| &d.summary)
            .collect::<Vec<_>>()
    );
}
