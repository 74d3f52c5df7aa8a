use crate::utils::error::Result;

/// 存儲介面，對應網頁端的 local storage
pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn base_url(&self) -> &str;
    fn anon_key(&self) -> &str;
    fn contacts_table(&self) -> &str;
    fn rpc_function(&self) -> &str;
    fn timeout_seconds(&self) -> u64;
}
