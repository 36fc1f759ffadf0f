/// A fieldless enum that can print its variant name as an uppercase-free-form
/// mnemonic string, independent of `Debug`.
///
/// Derived via `#[derive(Mnemonic)]` in `util_derive`.
pub trait Mnemonic {
    fn mnemonic(&self) -> &'static str;
}
