pub mod category;
pub mod category_content;
pub mod product;
pub mod product_content;
pub mod product_image;
pub mod subcategory;
pub mod subcategory_content;
