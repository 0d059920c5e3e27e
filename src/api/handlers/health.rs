/*
 * Responsibility
 * - GET / liveness text
 */
pub async fn liveness() -> &'static str {
    "smart deals server is running"
}
