pub mod books;
pub mod users;

use bookshelf_kernel::{settings::Settings, ModuleRegistry};

use users::AccountService;

/// Register all application modules with the registry
pub fn register_all(
    registry: &mut ModuleRegistry,
    settings: &Settings,
    service: AccountService,
) -> anyhow::Result<()> {
    registry.register(users::create_module(service, &settings.graphql))?;
    Ok(())
}
