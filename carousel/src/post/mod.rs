pub mod draw_result;
