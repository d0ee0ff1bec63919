mod product_list;

pub use product_list::build_product_list;
