// src/api/mod.rs
//
// トランスポート層（ルーティング・認証）は組み込み側アプリケーションが
// 提供する。ここではコアとやり取りするDTOのみを定義する。
pub mod dto;
