pub mod a001_assistant;
