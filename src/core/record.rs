//! Record trait shared by every entity kind

use crate::core::collection::Collection;
use crate::core::document::{Fields, encode};
use crate::core::error::{Result, ValidationError};
use crate::core::validation::RecordValidation;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// A typed record stored in one per-user collection.
///
/// Records carry the backend-assigned id in an `id` field that is never
/// written back (`#[serde(default, skip_serializing)]`). Partial updates go
/// through the associated `Patch` type, whose `None` fields are left out of
/// the update.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Partial-update type
    type Patch: Serialize + Send + Sync;

    /// Collection this record lives in
    const COLLECTION: Collection;

    /// Backend-assigned id (empty before the first write)
    fn id(&self) -> &str;

    /// Field validators
    fn validation() -> RecordValidation;

    /// Checks on typed values the JSON encoding would hide (NaN and
    /// infinities encode as `null`)
    fn check_values(&self) -> std::result::Result<(), ValidationError> {
        Ok(())
    }

    /// Same as [`Record::check_values`], for a partial update
    fn check_patch(_patch: &Self::Patch) -> std::result::Result<(), ValidationError> {
        Ok(())
    }

    /// Owning client, when the record references one
    fn client_id(&self) -> Option<&str> {
        None
    }

    /// Validate and encode for an `add`
    fn to_fields(&self) -> Result<Fields> {
        self.check_values()?;
        Ok(Self::validation().check_create(encode(self)?)?)
    }

    /// Validate and encode a partial update
    fn patch_fields(patch: &Self::Patch) -> Result<Fields> {
        Self::check_patch(patch)?;
        Ok(Self::validation().check_update(encode(patch)?)?)
    }
}
