mod faas_tests;
mod home_tests;
