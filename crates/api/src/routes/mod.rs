pub mod image_proxy;
