//! GLEIF API response shapes.
//!
//! Every field is optional: items missing a name or an identifier are
//! skipped rather than failing the whole response.

use serde::Deserialize;
use serde_json::Value;

use crate::errors::GleifError;
use crate::http::HttpResponse;
use crate::models::{ArchiveMetadata, EntityCandidate};

/// `{data: [...]}` wrapper used by the list endpoints.
#[derive(Debug, Deserialize)]
struct ListEnvelope<T> {
    data: Option<Vec<T>>,
}

impl<T> ListEnvelope<T> {
    fn into_items(self) -> Vec<T> {
        self.data.unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct ResourceId {
    #[serde(default)]
    id: Option<String>,
}

// ============================================================================
// Autocompletions
// ============================================================================

#[derive(Debug, Deserialize)]
struct CompletionItem {
    #[serde(default)]
    attributes: Option<CompletionAttributes>,
    #[serde(default)]
    relationships: Option<CompletionRelationships>,
}

#[derive(Debug, Deserialize)]
struct CompletionAttributes {
    #[serde(default)]
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionRelationships {
    #[serde(rename = "lei-records", default)]
    lei_records: Option<RelationshipLink>,
}

#[derive(Debug, Deserialize)]
struct RelationshipLink {
    #[serde(default)]
    data: Option<ResourceId>,
}

impl CompletionItem {
    fn into_candidate(self) -> Option<EntityCandidate> {
        let name = self.attributes?.value.filter(|v| !v.is_empty())?;
        let lei = self
            .relationships?
            .lei_records?
            .data?
            .id
            .filter(|id| !id.is_empty())?;
        Some(EntityCandidate::new(name, lei))
    }
}

/// Extract `(legal_name, lei)` pairs from an autocompletions response.
pub(crate) fn parse_autocompletions(
    response: &HttpResponse,
) -> Result<Vec<EntityCandidate>, GleifError> {
    let envelope: ListEnvelope<CompletionItem> = response.json()?;
    Ok(envelope
        .into_items()
        .into_iter()
        .filter_map(CompletionItem::into_candidate)
        .collect())
}

// ============================================================================
// LEI records
// ============================================================================

#[derive(Debug, Deserialize)]
struct LeiRecordItem {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    attributes: Option<LeiRecordAttributes>,
}

#[derive(Debug, Deserialize)]
struct LeiRecordAttributes {
    #[serde(default)]
    entity: Option<EntityAttributes>,
}

#[derive(Debug, Deserialize)]
struct EntityAttributes {
    #[serde(rename = "legalName", default)]
    legal_name: Option<LegalName>,
}

#[derive(Debug, Deserialize)]
struct LegalName {
    #[serde(default)]
    name: Option<String>,
}

impl LeiRecordItem {
    fn into_candidate(self) -> Option<EntityCandidate> {
        let lei = self.id.filter(|id| !id.is_empty())?;
        let name = self
            .attributes?
            .entity?
            .legal_name?
            .name
            .filter(|n| !n.is_empty())?;
        Some(EntityCandidate::new(name, lei))
    }
}

/// Extract `(legal_name, lei)` pairs from a lei-records response.
pub(crate) fn parse_lei_records(
    response: &HttpResponse,
) -> Result<Vec<EntityCandidate>, GleifError> {
    let envelope: ListEnvelope<LeiRecordItem> = response.json()?;
    Ok(envelope
        .into_items()
        .into_iter()
        .filter_map(LeiRecordItem::into_candidate)
        .collect())
}

/// Extract bare LEIs from a lei-records response.
pub(crate) fn parse_lei_ids(response: &HttpResponse) -> Result<Vec<String>, GleifError> {
    let envelope: ListEnvelope<ResourceId> = response.json()?;
    Ok(envelope
        .into_items()
        .into_iter()
        .filter_map(|item| item.id.filter(|id| !id.is_empty()))
        .collect())
}

// ============================================================================
// Mapping metadata
// ============================================================================

#[derive(Debug, Deserialize)]
struct MetadataEnvelope {
    #[serde(default)]
    data: Option<MetadataData>,
}

#[derive(Debug, Deserialize)]
struct MetadataData {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    attributes: Option<MetadataAttributes>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MetadataAttributes {
    #[serde(default)]
    file_name: Option<String>,
    #[serde(default)]
    uploaded_at: Option<String>,
    #[serde(default)]
    download_link: Option<String>,
}

fn value_to_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// Extract the archive metadata from the mapping endpoint response.
pub(crate) fn parse_metadata(response: &HttpResponse) -> Result<ArchiveMetadata, GleifError> {
    let envelope: MetadataEnvelope = response.json()?;
    let Some(data) = envelope.data else {
        return Ok(ArchiveMetadata::default());
    };
    let attributes = data.attributes.unwrap_or_default();

    Ok(ArchiveMetadata {
        id: data.id.and_then(value_to_string),
        file_name: attributes.file_name,
        uploaded_at: attributes.uploaded_at,
        download_link: attributes.download_link.filter(|link| !link.is_empty()),
    })
}
