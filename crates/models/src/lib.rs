pub mod db;
pub mod subscription;

#[cfg(test)]
mod tests;
