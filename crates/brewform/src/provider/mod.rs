//! Provider contract between the host and a backend.
//!
//! A host drives providers through these traits: it asks for the current
//! state (`query`, `instances`) and calls the mutating operations when the
//! declared state differs.

pub mod package;
pub mod tap;

pub use package::HomebrewProvider;
pub use tap::TapProvider;

use crate::core::resource::ProviderKind;
use crate::utils::ProviderResult;

/// Operations every provider supports
pub trait Provider {
    type Resource;
    type Fact;

    /// Which backend this provider drives
    fn kind(&self) -> ProviderKind;

    fn install(&self, resource: &Self::Resource) -> ProviderResult<()>;

    fn uninstall(&self, resource: &Self::Resource) -> ProviderResult<()>;

    /// Current state of one resource, `None` when absent
    fn query(&self, resource: &Self::Resource) -> ProviderResult<Option<Self::Fact>>;

    /// Every resource of this type present on the system
    fn instances(&self) -> ProviderResult<Vec<Self::Fact>>;
}

/// Providers whose resources carry versions
pub trait Upgradeable: Provider {
    /// Bring an installed resource up to date
    fn update(&self, resource: &Self::Resource) -> ProviderResult<()> {
        self.install(resource)
    }

    /// Version text of the resource as it is installed now
    fn latest(&self, resource: &Self::Resource) -> ProviderResult<Option<String>>;
}
