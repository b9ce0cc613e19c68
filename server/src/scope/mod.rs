pub mod entity_record;
pub mod scope_manager;
