pub mod demo;
pub mod script;
pub mod web;

use anyhow::Result;

use crate::block::Block;

/// The oracle capability the solver consumes: a pure function
/// of two full blocks to a boolean. Modeled as a trait rather than a
/// dynamically loaded module, so the solver takes `&impl Oracle` and never
/// has to introspect what's behind it.
pub trait Oracle: Sync {
    /// Returns `true` iff `prev ‖ target`, decrypted under the unknown key,
    /// is valid PKCS#7. Transport failures and timeouts are returned as
    /// `Err`, never folded into `false`.
    fn ask(&self, prev: &Block, target: &Block) -> Result<bool>;
}
