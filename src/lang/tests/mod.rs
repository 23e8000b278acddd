mod preprocess_test;
mod address_test;
mod compile_test;
