pub mod batch_form;
pub mod batch_table;
pub mod egg_form;
pub mod header;
pub mod loss_form;
pub mod summary_card;
