// @generated
// This file is @generated by prost-build.
/// Addressing, credentials and data point selector for one meter.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Meter {
    #[prost(string, tag = "1")]
    pub ip: ::prost::alloc::string::String,
    #[prost(int32, tag = "2")]
    pub port: i32,
    #[prost(string, tag = "3")]
    pub auth_password: ::prost::alloc::string::String,
    #[prost(string, tag = "4")]
    pub system_title: ::prost::alloc::string::String,
    #[prost(string, tag = "5")]
    pub block_cipher_key: ::prost::alloc::string::String,
    #[prost(string, tag = "6")]
    pub auth_key: ::prost::alloc::string::String,
    #[prost(string, tag = "7")]
    pub client_address: ::prost::alloc::string::String,
    #[prost(string, tag = "8")]
    pub server_address: ::prost::alloc::string::String,
    #[prost(string, tag = "9")]
    pub obis: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetBlockLoadProfileRequest {
    #[prost(message, repeated, tag = "1")]
    pub meter: ::prost::alloc::vec::Vec<Meter>,
    #[prost(int32, tag = "2")]
    pub retries: i32,
    /// Seconds.
    #[prost(int32, tag = "3")]
    pub connection_timeout: i32,
    /// Seconds.
    #[prost(int32, tag = "4")]
    pub retry_delay: i32,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BlockLoadProfile {
    #[prost(string, tag = "1")]
    pub date_time: ::prost::alloc::string::String,
    #[prost(double, tag = "2")]
    pub average_voltage: f64,
    #[prost(double, tag = "3")]
    pub block_energy_wh_import: f64,
    #[prost(double, tag = "4")]
    pub block_energy_vah_import: f64,
    #[prost(double, tag = "5")]
    pub block_energy_wh_export: f64,
    #[prost(double, tag = "6")]
    pub block_energy_vah_export: f64,
    #[prost(double, tag = "7")]
    pub average_current: f64,
    #[prost(uint32, tag = "8")]
    pub meter_health_indicator: u32,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetBlockLoadProfileResponse {
    #[prost(string, tag = "1")]
    pub meter_ip: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "2")]
    pub profile: ::core::option::Option<BlockLoadProfile>,
}
/// Generated client implementations.
pub mod dlms_processor_client {
    #![allow(
        unused_variables,
        dead_code,
        missing_docs,
        clippy::wildcard_imports,
        clippy::let_unit_value,
    )]
    use tonic::codegen::*;
    use tonic::codegen::http::Uri;
    #[derive(Debug, Clone)]
    pub struct DlmsProcessorClient<T> {
        inner: tonic::client::Grpc<T>,
    }
    impl DlmsProcessorClient<tonic::transport::Channel> {
        /// Attempt to create a new client by connecting to a given endpoint.
        pub async fn connect<D>(dst: D) -> Result<Self, tonic::transport::Error>
        where
            D: TryInto<tonic::transport::Endpoint>,
            D::Error: Into<StdError>,
        {
            let conn = tonic::transport::Endpoint::new(dst)?.connect().await?;
            Ok(Self::new(conn))
        }
    }
    impl<T> DlmsProcessorClient<T>
    where
        T: tonic::client::GrpcService<tonic::body::Body>,
        T::Error: Into<StdError>,
        T::ResponseBody: Body<Data = Bytes> + std::marker::Send + 'static,
        <T::ResponseBody as Body>::Error: Into<StdError> + std::marker::Send,
    {
        pub fn new(inner: T) -> Self {
            let inner = tonic::client::Grpc::new(inner);
            Self { inner }
        }
        pub fn with_origin(inner: T, origin: Uri) -> Self {
            let inner = tonic::client::Grpc::with_origin(inner, origin);
            Self { inner }
        }
        pub fn with_interceptor<F>(
            inner: T,
            interceptor: F,
        ) -> DlmsProcessorClient<InterceptedService<T, F>>
        where
            F: tonic::service::Interceptor,
            T::ResponseBody: Default,
            T: tonic::codegen::Service<
                http::Request<tonic::body::Body>,
                Response = http::Response<
                    <T as tonic::client::GrpcService<tonic::body::Body>>::ResponseBody,
                >,
            >,
            <T as tonic::codegen::Service<
                http::Request<tonic::body::Body>,
            >>::Error: Into<StdError> + std::marker::Send + std::marker::Sync,
        {
            DlmsProcessorClient::new(InterceptedService::new(inner, interceptor))
        }
        /// Compress requests with the given encoding.
        ///
        /// This requires the server to support it otherwise it might respond with an
        /// error.
        #[must_use]
        pub fn send_compressed(mut self, encoding: CompressionEncoding) -> Self {
            self.inner = self.inner.send_compressed(encoding);
            self
        }
        /// Enable decompressing responses.
        #[must_use]
        pub fn accept_compressed(mut self, encoding: CompressionEncoding) -> Self {
            self.inner = self.inner.accept_compressed(encoding);
            self
        }
        /// Limits the maximum size of a decoded message.
        ///
        /// Default: `4MB`
        #[must_use]
        pub fn max_decoding_message_size(mut self, limit: usize) -> Self {
            self.inner = self.inner.max_decoding_message_size(limit);
            self
        }
        /// Limits the maximum size of an encoded message.
        ///
        /// Default: `usize::MAX`
        #[must_use]
        pub fn max_encoding_message_size(mut self, limit: usize) -> Self {
            self.inner = self.inner.max_encoding_message_size(limit);
            self
        }
        pub async fn get_block_load_profile(
            &mut self,
            request: impl tonic::IntoRequest<super::GetBlockLoadProfileRequest>,
        ) -> std::result::Result<
            tonic::Response<tonic::codec::Streaming<super::GetBlockLoadProfileResponse>>,
            tonic::Status,
        > {
            self.inner
                .ready()
                .await
                .map_err(|e| {
                    tonic::Status::unknown(
                        format!("Service was not ready: {}", e.into()),
                    )
                })?;
            let codec = tonic_prost::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static(
                "/dlmsprocessor.DLMSProcessor/GetBlockLoadProfile",
            );
            let mut req = request.into_request();
            req.extensions_mut()
                .insert(
                    GrpcMethod::new("dlmsprocessor.DLMSProcessor", "GetBlockLoadProfile"),
                );
            self.inner.server_streaming(req, path, codec).await
        }
    }
}
/// Generated server implementations.
pub mod dlms_processor_server {
    #![allow(
        unused_variables,
        dead_code,
        missing_docs,
        clippy::wildcard_imports,
        clippy::let_unit_value,
    )]
    use tonic::codegen::*;
    /// Generated trait containing gRPC methods that should be implemented for use with DlmsProcessorServer.
    #[async_trait]
    pub trait DlmsProcessor: std::marker::Send + std::marker::Sync + 'static {
        /// Server streaming response type for the GetBlockLoadProfile method.
        type GetBlockLoadProfileStream: tonic::codegen::tokio_stream::Stream<
                Item = std::result::Result<
                    super::GetBlockLoadProfileResponse,
                    tonic::Status,
                >,
            >
            + std::marker::Send
            + 'static;
        async fn get_block_load_profile(
            &self,
            request: tonic::Request<super::GetBlockLoadProfileRequest>,
        ) -> std::result::Result<
            tonic::Response<Self::GetBlockLoadProfileStream>,
            tonic::Status,
        >;
    }
    #[derive(Debug)]
    pub struct DlmsProcessorServer<T> {
        inner: Arc<T>,
        accept_compression_encodings: EnabledCompressionEncodings,
        send_compression_encodings: EnabledCompressionEncodings,
        max_decoding_message_size: Option<usize>,
        max_encoding_message_size: Option<usize>,
    }
    impl<T> DlmsProcessorServer<T> {
        pub fn new(inner: T) -> Self {
            Self::from_arc(Arc::new(inner))
        }
        pub fn from_arc(inner: Arc<T>) -> Self {
            Self {
                inner,
                accept_compression_encodings: Default::default(),
                send_compression_encodings: Default::default(),
                max_decoding_message_size: None,
                max_encoding_message_size: None,
            }
        }
        pub fn with_interceptor<F>(
            inner: T,
            interceptor: F,
        ) -> InterceptedService<Self, F>
        where
            F: tonic::service::Interceptor,
        {
            InterceptedService::new(Self::new(inner), interceptor)
        }
        /// Enable decompressing requests with the given encoding.
        #[must_use]
        pub fn accept_compressed(mut self, encoding: CompressionEncoding) -> Self {
            self.accept_compression_encodings.enable(encoding);
            self
        }
        /// Compress responses with the given encoding, if the client supports it.
        #[must_use]
        pub fn send_compressed(mut self, encoding: CompressionEncoding) -> Self {
            self.send_compression_encodings.enable(encoding);
            self
        }
        /// Limits the maximum size of a decoded message.
        ///
        /// Default: `4MB`
        #[must_use]
        pub fn max_decoding_message_size(mut self, limit: usize) -> Self {
            self.max_decoding_message_size = Some(limit);
            self
        }
        /// Limits the maximum size of an encoded message.
        ///
        /// Default: `usize::MAX`
        #[must_use]
        pub fn max_encoding_message_size(mut self, limit: usize) -> Self {
            self.max_encoding_message_size = Some(limit);
            self
        }
    }
    impl<T, B> tonic::codegen::Service<http::Request<B>> for DlmsProcessorServer<T>
    where
        T: DlmsProcessor,
        B: Body + std::marker::Send + 'static,
        B::Error: Into<StdError> + std::marker::Send + 'static,
    {
        type Response = http::Response<tonic::body::Body>;
        type Error = std::convert::Infallible;
        type Future = BoxFuture<Self::Response, Self::Error>;
        fn poll_ready(
            &mut self,
            _cx: &mut Context<'_>,
        ) -> Poll<std::result::Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }
        fn call(&mut self, req: http::Request<B>) -> Self::Future {
            match req.uri().path() {
                "/dlmsprocessor.DLMSProcessor/GetBlockLoadProfile" => {
                    #[allow(non_camel_case_types)]
                    struct GetBlockLoadProfileSvc<T: DlmsProcessor>(pub Arc<T>);
                    impl<
                        T: DlmsProcessor,
                    > tonic::server::ServerStreamingService<
                        super::GetBlockLoadProfileRequest,
                    > for GetBlockLoadProfileSvc<T> {
                        type Response = super::GetBlockLoadProfileResponse;
                        type ResponseStream = T::GetBlockLoadProfileStream;
                        type Future = BoxFuture<
                            tonic::Response<Self::ResponseStream>,
                            tonic::Status,
                        >;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::GetBlockLoadProfileRequest>,
                        ) -> Self::Future {
                            let inner = Arc::clone(&self.0);
                            let fut = async move {
                                <T as DlmsProcessor>::get_block_load_profile(
                                        &inner,
                                        request,
                                    )
                                    .await
                            };
                            Box::pin(fut)
                        }
                    }
                    let accept_compression_encodings = self.accept_compression_encodings;
                    let send_compression_encodings = self.send_compression_encodings;
                    let max_decoding_message_size = self.max_decoding_message_size;
                    let max_encoding_message_size = self.max_encoding_message_size;
                    let inner = self.inner.clone();
                    let fut = async move {
                        let method = GetBlockLoadProfileSvc(inner);
                        let codec = tonic_prost::ProstCodec::default();
                        let mut grpc = tonic::server::Grpc::new(codec)
                            .apply_compression_config(
                                accept_compression_encodings,
                                send_compression_encodings,
                            )
                            .apply_max_message_size_config(
                                max_decoding_message_size,
                                max_encoding_message_size,
                            );
                        let res = grpc.server_streaming(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                _ => {
                    Box::pin(async move {
                        let mut response = http::Response::new(
                            tonic::body::Body::default(),
                        );
                        let headers = response.headers_mut();
                        headers
                            .insert(
                                tonic::Status::GRPC_STATUS,
                                (tonic::Code::Unimplemented as i32).into(),
                            );
                        headers
                            .insert(
                                http::header::CONTENT_TYPE,
                                tonic::metadata::GRPC_CONTENT_TYPE,
                            );
                        Ok(response)
                    })
                }
            }
        }
    }
    impl<T> Clone for DlmsProcessorServer<T> {
        fn clone(&self) -> Self {
            let inner = self.inner.clone();
            Self {
                inner,
                accept_compression_encodings: self.accept_compression_encodings,
                send_compression_encodings: self.send_compression_encodings,
                max_decoding_message_size: self.max_decoding_message_size,
                max_encoding_message_size: self.max_encoding_message_size,
            }
        }
    }
    /// Generated gRPC service name
    pub const SERVICE_NAME: &str = "dlmsprocessor.DLMSProcessor";
    impl<T> tonic::server::NamedService for DlmsProcessorServer<T> {
        const NAME: &'static str = SERVICE_NAME;
    }
}
