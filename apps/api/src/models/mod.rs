pub mod planogram;
