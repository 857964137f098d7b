pub(crate) mod fs_store;
