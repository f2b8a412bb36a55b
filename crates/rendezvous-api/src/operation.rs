//! Generic operation dispatch.
//!
//! Every REST route and the `POST /api/operations` endpoint funnel into
//! [`execute`]. A request names a kind, an operation, and optionally an
//! identifier, a payload, and a list of relational fields to embed:
//!
//! ```json
//! { "kind": "events", "operation": "get", "id": "e1", "include": ["user"] }
//! ```
//!
//! Reads never fail: `get` of an unknown identifier yields `null`. Update
//! and delete of an unknown identifier fail with a not-found error.

use rendezvous_store::{DataService, Relation, Resolver, Stored};
use rendezvous_types::{
    AnyRecord, CreateEventInput, CreateLocationInput, CreateParticipantInput, CreateUserInput,
    EntityKind, Event, Location, Participant, UpdateEventInput, UpdateLocationInput,
    UpdateParticipantInput, UpdateUserInput, User,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::ApiError;

/// Run `$body` with `$R` bound to the record type for `$kind`.
macro_rules! for_kind {
    ($kind:expr, |$R:ident| $body:expr) => {
        match $kind {
            EntityKind::User => {
                type $R = User;
                $body
            }
            EntityKind::Location => {
                type $R = Location;
                $body
            }
            EntityKind::Event => {
                type $R = Event;
                $body
            }
            EntityKind::Participant => {
                type $R = Participant;
                $body
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

/// Operation names accepted on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationName {
    /// Every record of the kind.
    List,
    /// One record by identifier.
    Get,
    /// Insert a new record.
    Create,
    /// Merge fields over an existing record.
    Update,
    /// Remove one record.
    Delete,
    /// Remove every record of the kind.
    #[serde(alias = "delete_all")]
    DeleteAll,
}

/// The body of `POST /api/operations`.
#[derive(Debug, Clone, Deserialize)]
pub struct OperationRequest {
    /// Entity kind, singular or plural.
    pub kind: String,
    /// What to do.
    pub operation: OperationName,
    /// Target identifier for `get`, `update`, and `delete`. Numbers are
    /// accepted and compared as their decimal text.
    #[serde(default)]
    pub id: Option<Value>,
    /// Payload for `create` and `update`.
    #[serde(default)]
    pub data: Option<Value>,
    /// Relational fields to resolve and embed in each returned record.
    #[serde(default)]
    pub include: Vec<String>,
}

impl OperationRequest {
    /// Validate the request and turn it into a typed [`Invocation`].
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::BadRequest`] for an unknown kind or relation, a
    /// missing identifier or payload, or a payload of the wrong shape.
    pub fn into_invocation(self) -> Result<Invocation, ApiError> {
        let Self {
            kind,
            operation,
            id,
            data,
            include,
        } = self;
        let kind: EntityKind = kind.parse()?;
        let include = parse_include(kind, &include)?;

        let operation = match operation {
            OperationName::List => Operation::List(kind),
            OperationName::Get => Operation::Get(kind, id_text(id)?),
            OperationName::Create => Operation::Create(CreateInput::parse(kind, payload(data)?)?),
            OperationName::Update => {
                Operation::Update(id_text(id)?, UpdateInput::parse(kind, payload(data)?)?)
            }
            OperationName::Delete => Operation::Delete(kind, id_text(id)?),
            OperationName::DeleteAll => Operation::DeleteAll(kind),
        };
        Ok(Invocation { operation, include })
    }
}

fn id_text(id: Option<Value>) -> Result<String, ApiError> {
    match id {
        Some(Value::String(text)) => Ok(text),
        Some(Value::Number(number)) if number.is_i64() || number.is_u64() => {
            Ok(number.to_string())
        }
        Some(other) => Err(ApiError::BadRequest(format!(
            "id must be a string or integer, got {other}"
        ))),
        None => Err(ApiError::BadRequest(String::from("missing id"))),
    }
}

fn payload(data: Option<Value>) -> Result<Value, ApiError> {
    data.ok_or_else(|| ApiError::BadRequest(String::from("missing data")))
}

/// Resolve relational field names against `kind`.
///
/// # Errors
///
/// Returns [`ApiError::BadRequest`] naming the first unknown field.
pub fn parse_include<S: AsRef<str>>(
    kind: EntityKind,
    fields: &[S],
) -> Result<Vec<Relation>, ApiError> {
    fields
        .iter()
        .map(|field| {
            let field = field.as_ref().trim();
            Relation::lookup(kind, field).ok_or_else(|| {
                ApiError::BadRequest(format!("{kind} has no relation named {field}"))
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Typed operations
// ---------------------------------------------------------------------------

/// A creation payload for any kind.
#[derive(Debug, Clone, PartialEq)]
pub enum CreateInput {
    /// New user.
    User(CreateUserInput),
    /// New location.
    Location(CreateLocationInput),
    /// New event.
    Event(CreateEventInput),
    /// New participant.
    Participant(CreateParticipantInput),
}

impl CreateInput {
    /// Deserialize `data` as the creation payload for `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::BadRequest`] if a required field is missing or
    /// has the wrong type.
    pub fn parse(kind: EntityKind, data: Value) -> Result<Self, ApiError> {
        let parsed = match kind {
            EntityKind::User => serde_json::from_value(data).map(Self::User),
            EntityKind::Location => serde_json::from_value(data).map(Self::Location),
            EntityKind::Event => serde_json::from_value(data).map(Self::Event),
            EntityKind::Participant => serde_json::from_value(data).map(Self::Participant),
        };
        parsed.map_err(|err| ApiError::invalid_payload(&err))
    }

    /// The kind this payload creates.
    pub const fn kind(&self) -> EntityKind {
        match self {
            Self::User(_) => EntityKind::User,
            Self::Location(_) => EntityKind::Location,
            Self::Event(_) => EntityKind::Event,
            Self::Participant(_) => EntityKind::Participant,
        }
    }
}

/// A partial update for any kind.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateInput {
    /// User fields.
    User(UpdateUserInput),
    /// Location fields.
    Location(UpdateLocationInput),
    /// Event fields.
    Event(UpdateEventInput),
    /// Participant fields.
    Participant(UpdateParticipantInput),
}

impl UpdateInput {
    /// Deserialize `data` as the update payload for `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::BadRequest`] if a supplied field has the wrong
    /// type.
    pub fn parse(kind: EntityKind, data: Value) -> Result<Self, ApiError> {
        let parsed = match kind {
            EntityKind::User => serde_json::from_value(data).map(Self::User),
            EntityKind::Location => serde_json::from_value(data).map(Self::Location),
            EntityKind::Event => serde_json::from_value(data).map(Self::Event),
            EntityKind::Participant => serde_json::from_value(data).map(Self::Participant),
        };
        parsed.map_err(|err| ApiError::invalid_payload(&err))
    }

    /// The kind this payload updates.
    pub const fn kind(&self) -> EntityKind {
        match self {
            Self::User(_) => EntityKind::User,
            Self::Location(_) => EntityKind::Location,
            Self::Event(_) => EntityKind::Event,
            Self::Participant(_) => EntityKind::Participant,
        }
    }
}

/// A validated operation against one collection.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Every record of the kind, in insertion order.
    List(EntityKind),
    /// One record, or `null`.
    Get(EntityKind, String),
    /// Insert a record with a generated identifier.
    Create(CreateInput),
    /// Merge fields over the record with this identifier.
    Update(String, UpdateInput),
    /// Remove the record with this identifier.
    Delete(EntityKind, String),
    /// Empty the collection.
    DeleteAll(EntityKind),
}

impl Operation {
    /// The collection this operation touches.
    pub const fn kind(&self) -> EntityKind {
        match self {
            Self::List(kind) | Self::Get(kind, _) | Self::Delete(kind, _) | Self::DeleteAll(kind) => {
                *kind
            }
            Self::Create(input) => input.kind(),
            Self::Update(_, patch) => patch.kind(),
        }
    }
}

/// An operation plus the relational fields to embed in its result.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    /// What to do.
    pub operation: Operation,
    /// Relations resolved for every returned record.
    pub include: Vec<Relation>,
}

impl Invocation {
    /// An invocation that embeds no relations.
    pub const fn new(operation: Operation) -> Self {
        Self {
            operation,
            include: Vec::new(),
        }
    }

    /// Embed `include` in every returned record.
    #[must_use]
    pub fn with_include(mut self, include: Vec<Relation>) -> Self {
        self.include = include;
        self
    }
}

/// The result of an operation.
///
/// Serializes as the record (or `null`), an array, or `{"count": n}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OperationOutput {
    /// A single record, `null` when a read found nothing.
    Record(Value),
    /// Zero or more records.
    Records(Vec<Value>),
    /// How many records a delete-all removed.
    Count {
        /// Number of records removed.
        count: usize,
    },
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

/// Run `invocation` against `service`.
///
/// # Errors
///
/// Returns [`ApiError::NotFound`] when an update or delete names an unknown
/// identifier, and [`ApiError::Internal`] if identifier generation gives up.
pub async fn execute(
    service: &DataService,
    invocation: Invocation,
) -> Result<OperationOutput, ApiError> {
    let Invocation { operation, include } = invocation;
    debug!(kind = %operation.kind(), ?operation, "executing operation");

    match operation {
        Operation::List(kind) => for_kind!(kind, |R| list::<R>(service, &include).await),
        Operation::Get(kind, id) => for_kind!(kind, |R| get::<R>(service, id, &include).await),
        Operation::Delete(kind, id) => {
            for_kind!(kind, |R| delete::<R>(service, id, &include).await)
        }
        Operation::DeleteAll(kind) => {
            let count = for_kind!(kind, |R| service.mutations().delete_all::<R>().await);
            Ok(OperationOutput::Count { count })
        }
        Operation::Create(input) => {
            let mutations = service.mutations();
            let record: AnyRecord = match input {
                CreateInput::User(input) => mutations.create(input).await?.into(),
                CreateInput::Location(input) => mutations.create(input).await?.into(),
                CreateInput::Event(input) => mutations.create(input).await?.into(),
                CreateInput::Participant(input) => mutations.create(input).await?.into(),
            };
            single(service, record, &include).await
        }
        Operation::Update(id, patch) => {
            let mutations = service.mutations();
            let record: AnyRecord = match patch {
                UpdateInput::User(patch) => mutations.update(&id.into(), patch).await?.into(),
                UpdateInput::Location(patch) => mutations.update(&id.into(), patch).await?.into(),
                UpdateInput::Event(patch) => mutations.update(&id.into(), patch).await?.into(),
                UpdateInput::Participant(patch) => {
                    mutations.update(&id.into(), patch).await?.into()
                }
            };
            single(service, record, &include).await
        }
    }
}

async fn list<R>(service: &DataService, include: &[Relation]) -> Result<OperationOutput, ApiError>
where
    R: Stored + Into<AnyRecord>,
{
    let resolver = service.resolver();
    let mut records = Vec::new();
    for record in service.list::<R>().await {
        records.push(expand(&resolver, &record.into(), include).await?);
    }
    Ok(OperationOutput::Records(records))
}

async fn get<R>(
    service: &DataService,
    id: String,
    include: &[Relation],
) -> Result<OperationOutput, ApiError>
where
    R: Stored + Into<AnyRecord>,
{
    match service.find::<R>(&R::Id::from(id)).await {
        Some(record) => single(service, record.into(), include).await,
        None => Ok(OperationOutput::Record(Value::Null)),
    }
}

async fn delete<R>(
    service: &DataService,
    id: String,
    include: &[Relation],
) -> Result<OperationOutput, ApiError>
where
    R: Stored + Into<AnyRecord>,
{
    let removed = service.mutations().delete::<R>(&R::Id::from(id)).await?;
    single(service, removed.into(), include).await
}

async fn single(
    service: &DataService,
    record: AnyRecord,
    include: &[Relation],
) -> Result<OperationOutput, ApiError> {
    let value = expand(&service.resolver(), &record, include).await?;
    Ok(OperationOutput::Record(value))
}

/// Serialize `record` and embed each requested relation under its field
/// name.
pub async fn expand(
    resolver: &Resolver<'_>,
    record: &AnyRecord,
    include: &[Relation],
) -> Result<Value, ApiError> {
    let mut value = serde_json::to_value(record)?;
    for &relation in include {
        let Some(related) = resolver.resolve(relation, record).await else {
            continue;
        };
        if let Value::Object(fields) = &mut value {
            fields.insert(relation.field().to_owned(), serde_json::to_value(related)?);
        }
    }
    Ok(value)
}

/// Look up a record of any kind by identifier text.
pub async fn find_any(service: &DataService, kind: EntityKind, id: String) -> Option<AnyRecord> {
    for_kind!(kind, |R| service.find::<R>(&id.into()).await.map(AnyRecord::from))
}

/// Resolve the relational `field` of the record `kind`/`id`.
///
/// # Errors
///
/// Returns [`ApiError::BadRequest`] if `kind` has no such relation and
/// [`ApiError::NotFound`] if the source record does not exist. A dangling
/// reference is not an error: it resolves to `null` or `[]`.
pub async fn resolve_field(
    service: &DataService,
    kind: EntityKind,
    id: String,
    field: &str,
) -> Result<Value, ApiError> {
    let relation = Relation::lookup(kind, field)
        .ok_or_else(|| ApiError::BadRequest(format!("{kind} has no relation named {field}")))?;
    let source = find_any(service, kind, id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("{kind} not found")))?;
    let related = service.resolver().resolve(relation, &source).await;
    Ok(serde_json::to_value(related)?)
}
